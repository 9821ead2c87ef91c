use anyhow::Result;
use buildbadge::app::App;
use buildbadge::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let mut app = App::new(config)?;
    app.run().await
}
