pub async fn health_check() -> &'static str {
    "Agent Registry Service is healthy"
}
