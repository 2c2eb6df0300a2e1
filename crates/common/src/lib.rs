//! Pieces shared by every binary in the workspace: logging setup, the
//! health payload and the shutdown signal.

pub mod types;
pub mod utils;
pub mod shutdown;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
        assert_eq!(serde_json::to_value(&h).unwrap(), serde_json::json!({"status": "ok"}));
    }
}
