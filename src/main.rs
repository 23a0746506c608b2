use std::io::Write;

use anyhow::Context;
use redis_mock::{
    config::Config, input::split_command_line, Client, ClientOptions, CommandError, Multi, Reply,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PROMPT: &str = "redis-mock> ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::new(std::env::args())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = Client::new(ClientOptions::new().name("redis-mock"))?;

    if let Some(path) = &config.eval_file {
        let script = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        let reply = client.eval(script, Vec::<String>::new(), Vec::<String>::new()).await;
        print_result(reply);
        return Ok(());
    }

    run_shell(&client, config.quiet).await
}

async fn run_shell(client: &Client, quiet: bool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut transaction: Option<Multi> = None;

    loop {
        if !quiet {
            print!("{}", PROMPT);
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut arguments = match split_command_line(&line) {
            Ok(arguments) if arguments.is_empty() => continue,
            Ok(arguments) => arguments,
            Err(e) => {
                println!("(error) {}", e);
                continue;
            }
        };

        let name = arguments.remove(0);

        match name.to_uppercase().as_str() {
            "QUIT" | "EXIT" => break,
            "MULTI" => {
                if transaction.is_some() {
                    println!("(error) ERR MULTI calls can not be nested");
                } else {
                    transaction = Some(client.multi());
                    println!("OK");
                }
            }
            "EXEC" => match transaction.take() {
                Some(mut multi) => print_result(multi.exec().await.map(Reply::Array)),
                None => println!("(error) ERR EXEC without MULTI"),
            },
            "DISCARD" => match transaction.take() {
                Some(mut multi) => {
                    multi.discard();
                    println!("OK");
                }
                None => println!("(error) ERR DISCARD without MULTI"),
            },
            _ => match transaction.as_mut() {
                Some(multi) => match multi.command(&name, arguments) {
                    Ok(_) => println!("QUEUED"),
                    Err(e) => println!("(error) {}", e),
                },
                None => print_result(client.execute(&name, arguments).await),
            },
        }
    }

    Ok(())
}

fn print_result(result: Result<Reply, CommandError>) {
    match result {
        Ok(reply) => println!("{}", reply.to_cli_string()),
        Err(e) => println!("(error) {}", e),
    }
}
