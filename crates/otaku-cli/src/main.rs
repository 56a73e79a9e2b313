//! `otaku` binary entrypoint.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = otaku_cli::run().await;
    std::process::exit(exit_code);
}
