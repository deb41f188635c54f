pub mod product;

pub async fn health_check() -> &'static str {
    "OK"
}
