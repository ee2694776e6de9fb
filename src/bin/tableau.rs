use tableau::{config::Config, flow};

fn main() -> anyhow::Result<()> {
    flow::run(Config::default())
}
