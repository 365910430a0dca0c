pub mod prometheus {
    include!(concat!(env!("OUT_DIR"), "/prometheus.rs"));
}
