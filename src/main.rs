#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vidlingo_lib::init_tracing();
    let urls: Vec<String> = std::env::args().skip(1).collect();
    vidlingo_lib::run(urls).await
}
