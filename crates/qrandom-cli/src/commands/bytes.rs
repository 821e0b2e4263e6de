use std::io::Write;
use std::time::Duration;

use crate::error::CliError;

pub fn run(count: usize, wait: u64, format: &str) -> Result<(), CliError> {
    let pool = qrandom_core::get_instance()?;

    if !super::wait_for(&pool, count, Duration::from_secs(wait)) {
        log::warn!(
            "pool holds {} of {count} requested bytes after {wait}s",
            pool.available()
        );
    }

    let data = pool.get_bytes(count);
    qrandom_core::shutdown();

    if data.len() < count {
        eprintln!("Short read: {} of {count} bytes", data.len());
    }

    emit(&mut std::io::stdout().lock(), &data, format)?;
    Ok(())
}

fn emit(out: &mut impl Write, data: &[u8], format: &str) -> std::io::Result<()> {
    out.write_all(&super::encode(data, format))?;
    out.flush()
}
