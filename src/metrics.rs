use prometheus::{Encoder, GaugeVec, IntGauge, TextEncoder};
use soliscloud_rs::model::AggregateResult;
use soliscloud_rs::sensor::{self, Kind};

lazy_static! {
    static ref INVERTER_VALUE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("inverter_value", "value reported by inverter, see `metric` and `unit`",),
        &["unique_id", "inverter_sn", "station_name", "metric", "unit"],
    )
    .unwrap();
    static ref INVERTER_STATE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "inverter_state",
            "operational state code reported by inverter (1 online, 2 offline, 3 alarm)",
        ),
        &["unique_id", "inverter_sn", "station_name", "state"],
    )
    .unwrap();
    static ref INVERTER_COUNT_GAUGE: IntGauge = register_int_gauge!(opts!(
        "inverter_count",
        "number of inverters returned by last successful fetch",
    ))
    .unwrap();
    static ref STALE_GAUGE: IntGauge = register_int_gauge!(opts!(
        "data_stale",
        "1 if no fetch succeeded within the last two intervals",
    ))
    .unwrap();
}

/// Replace all inverter gauges with the values of `result`.
pub fn update(result: &AggregateResult, stale: bool) {
    INVERTER_VALUE_GAUGE.reset();
    INVERTER_STATE_GAUGE.reset();

    for record in &result.records {
        for reading in sensor::readings(record) {
            let value = match reading.value {
                Some(value) => value,
                None => continue,
            };
            let station_name = record.station_name().unwrap_or_default();

            match reading.kind {
                Kind::State => {
                    let text = reading.text.as_deref().unwrap_or_default();
                    INVERTER_STATE_GAUGE
                        .with_label_values(&[&reading.unique_id, &reading.sn, station_name, text])
                        .set(value);
                }
                _ => {
                    let unit = reading.unit.as_deref().unwrap_or_default();
                    INVERTER_VALUE_GAUGE
                        .with_label_values(&[
                            &reading.unique_id,
                            &reading.sn,
                            station_name,
                            reading.key,
                            unit,
                        ])
                        .set(value);
                }
            }
        }
    }

    INVERTER_COUNT_GAUGE.set(result.records.len() as i64);
    set_stale(stale);
}

pub fn set_stale(stale: bool) {
    STALE_GAUGE.set(stale as i64);
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, soliscloud_rs::Error> {
    // Gather the metrics.
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(soliscloud_rs::Error::FormatError))?;
    String::from_utf8(buffer).or(Err(soliscloud_rs::Error::FormatError))
}
