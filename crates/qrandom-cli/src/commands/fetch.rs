use std::time::Instant;

use qrandom_core::{EntropySource, HttpEntropySource, PoolConfig};

use crate::error::CliError;

pub fn run(count: usize) -> Result<(), CliError> {
    let config = PoolConfig::from_env()?;
    let source = HttpEntropySource::new(&config.api_url, &config.api_token)?;

    println!("Requesting {count} bytes from {}...", source.name());
    let t0 = Instant::now();
    let data = source.fetch(count).inspect_err(|_| {
        eprintln!("Gave up after {:.3}s", t0.elapsed().as_secs_f64());
    })?;
    println!(
        "Received {} bytes in {:.3}s",
        data.len(),
        t0.elapsed().as_secs_f64()
    );
    print!("{}", String::from_utf8_lossy(&super::encode(&data, "hex")));
    Ok(())
}
