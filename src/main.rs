use log::{error, info};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::process;

use deployer_config::utils::properties::read_properties;
use deployer_config::{
    DeploymentConfigurationController, Error, PlatformDefaults, PlatformPropertyBinder,
    PropertyBinder,
};

const USAGE: &str =
    "usage: deployer-config <platform.properties|platform.json> [deployment.properties]\n       deployer-config --schema";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(err) = run(&args) {
        error!("{}", err);
        eprintln!("{}", err);
        if let Error::UserInputError(_) = err {
            eprintln!("{}", USAGE);
        }
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Error> {
    match args {
        [flag] if flag == "--schema" => {
            let schema = schemars::schema_for!(PlatformDefaults);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        [platform] => print_effective(platform, None),
        [platform, deployment] => print_effective(platform, Some(deployment)),
        _ => Err(Error::UserInputError(
            "expected platform settings and an optional deployment properties file".to_owned(),
        )),
    }
}

/// Loads the platform defaults once, then resolves the deployment's properties (if any) against
/// them and prints the effective configuration as JSON.
fn print_effective(platform_path: &str, deployment_path: Option<&String>) -> Result<(), Error> {
    let defaults = load_platform_defaults(Path::new(platform_path))?;
    info!("Loaded platform defaults from {}", platform_path);

    let controller = DeploymentConfigurationController::new(defaults);

    let deployment_properties = match deployment_path {
        Some(path) => read_properties(Path::new(path))?,
        None => BTreeMap::new(),
    };
    let effective = controller.resolve_properties(&deployment_properties)?;

    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

/// Platform defaults may be given either as a JSON document or as dotted-path properties.
fn load_platform_defaults(path: &Path) -> Result<PlatformDefaults, Error> {
    let is_json = path
        .extension()
        .map(|extension| extension.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    } else {
        PlatformPropertyBinder::default().bind(&read_properties(path)?)
    }
}
