#[tokio::main]
async fn main() {
    lotto::start_server().await;
}
