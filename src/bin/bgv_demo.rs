//! Encrypt a vector, double it homomorphically, then walk the ciphertext down
//! the modulus chain, printing the decrypted values and the noise budget.
//!
//! `RUST_LOG=bgv_core=debug` shows the derived modulus chain.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bgv_core::prelude::*;

type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Clone, Debug, Parser)]
struct Args {
    /// Ring degree d (power of two).
    #[arg(short = 'd', long, default_value_t = 8)]
    ring_degree: usize,

    /// Bit length of the plaintext prime.
    #[arg(long, default_value_t = 8)]
    plain_bits: u32,

    /// Number of levels above level 0.
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Seed for a reproducible run; the OS generator is used otherwise.
    #[arg(long)]
    seed: Option<u64>,

    /// Values to encrypt.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true,
          default_values_t = [60, 61, 62, 63, 64, 65, 66, 67])]
    values: Vec<i64>,

    /// Also square the ciphertext and relinearize.
    #[arg(long, default_value_t = false)]
    square: bool,
}

fn sampler(seed: Option<u64>, stream: u64) -> Sampler {
    match seed {
        Some(s) => Sampler::seeded(s.wrapping_add(stream)),
        None => Sampler::from_os_rng(),
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let context = ContextBuilder::new()
        .ring_degree(args.ring_degree)
        .plain_modulus_bits(args.plain_bits)
        .depth(args.depth)
        .build()?;
    println!(
        "d = {}, p = {}, moduli = {:?}",
        context.poly_modulus_degree(),
        context.plain_modulus_value(),
        context.modulus_chain()
    );

    let mut keygen = KeyGenerator::with_sampler(&context, sampler(args.seed, 0), SecretDistribution::Gaussian)?;
    let public_key = keygen.create_public_key()?;
    let relin_keys = keygen.create_relin_keys()?;

    let encoder = Encoder::new(&context);
    let mut encryptor = Encryptor::with_sampler(&context, &public_key, sampler(args.seed, 1))?;
    let decryptor = Decryptor::new(&context, keygen.secret_key());
    let evaluator = Evaluator::new(&context);

    let n = args.values.len();
    let ct = encryptor.encrypt(&encoder.encode(&args.values)?)?;
    info!(level = ct.level(), "encrypted input");

    let mut current = if args.square {
        let squared = evaluator.multiply(&ct, &ct)?;
        evaluator.relinearize(&squared, &relin_keys)?
    } else {
        evaluator.add(&ct, &ct)?
    };

    loop {
        let decoded = encoder.decode(&decryptor.decrypt(&current)?)?;
        println!(
            "level {} (q = {}): {:?}, noise budget {} bits",
            current.level(),
            current.params().q(),
            &decoded[..n.min(decoded.len())],
            decryptor.noise_budget(&current)?
        );
        if current.level() == 0 {
            break;
        }
        current = evaluator.mod_switch(&current)?;
    }

    match evaluator.mod_switch(&current) {
        Err(err) if err.kind() == ErrorKind::Exhaustion => println!("level 0 reached: {err}"),
        Err(err) => return Err(err.into()),
        Ok(_) => return Err("modulus switch below level 0 unexpectedly succeeded".into()),
    }
    Ok(())
}
