use envview_cli::{command, init_tracing, run, Invocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = command().get_matches();
    let invocation = Invocation::from_matches(&matches)?;
    init_tracing(invocation.log_json);

    let mut stdout = std::io::stdout().lock();
    run(&invocation, &mut stdout).await
}
