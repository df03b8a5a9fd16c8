use anyhow::Result;
use thinfilm::problem::Problem;
use thinfilm::settings;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = settings::load_config()?;
    println!("{}", settings);

    let mut problem = Problem::new(settings)?;
    problem.solve()?;
    problem.writeup()
}
