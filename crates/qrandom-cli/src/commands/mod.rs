pub mod bytes;
pub mod fetch;
pub mod status;

use std::time::{Duration, Instant};

use qrandom_core::BufferPool;

/// Render bytes in one of the CLI output formats.
pub fn encode(data: &[u8], format: &str) -> Vec<u8> {
    match format {
        "hex" => {
            let mut hex: String = data.iter().map(|b| format!("{b:02x}")).collect();
            hex.push('\n');
            hex.into_bytes()
        }
        "uint8" => {
            let mut line = data
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            line.push('\n');
            line.into_bytes()
        }
        _ => data.to_vec(),
    }
}

/// Poll until the pool holds at least `want` bytes or `wait` elapses.
pub fn wait_for(pool: &BufferPool, want: usize, wait: Duration) -> bool {
    let deadline = Instant::now() + wait;
    loop {
        if pool.available() >= want {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(250));
    }
}
