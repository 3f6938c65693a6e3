use super::args::*;

pub mod judge;
pub(crate) mod output;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    judge::run(cli).await
}
