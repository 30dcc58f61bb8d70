use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};
use sysinfo::{get_current_pid, ProcessesToUpdate, System};

lazy_static! {
    pub static ref CODES_GENERATED: IntCounter =
        register_int_counter!("ldpc_codes_generated_total", "Number of (k, rate) codes generated").unwrap();
    pub static ref CODES_FAILED: IntCounter =
        register_int_counter!("ldpc_codes_failed_total", "Number of (k, rate) codes that failed to generate").unwrap();
    pub static ref MATRICES_INVERTED: IntCounter =
        register_int_counter!("gf2_matrices_inverted_total", "Number of GF(2) matrix inversions").unwrap();
    pub static ref GF2_ROW_ELIMINATIONS: IntCounter =
        register_int_counter!("gf2_row_eliminations_total", "Row XORs performed during elimination").unwrap();
    pub static ref RESIDENT_MEMORY_BYTES: IntGauge =
        register_int_gauge!("process_resident_memory_bytes_sampled", "Resident memory at last sample").unwrap();
    pub static ref PEAK_RESIDENT_MEMORY_BYTES: IntGauge =
        register_int_gauge!("process_peak_resident_memory_bytes_sampled", "Largest resident memory sampled").unwrap();
}

/// Samples the resident memory of this process and updates the gauges.
/// Returns the sampled value in bytes, or 0 if it could not be read.
pub fn update_memory_usage() -> u64 {
    let pid = match get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0,
    };
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    let bytes = sys.process(pid).map(|p| p.memory()).unwrap_or(0);
    RESIDENT_MEMORY_BYTES.set(bytes as i64);
    if bytes as i64 > PEAK_RESIDENT_MEMORY_BYTES.get() {
        PEAK_RESIDENT_MEMORY_BYTES.set(bytes as i64);
    }
    bytes
}

/// Renders every registered metric in the Prometheus text format.
pub fn gather_text() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
