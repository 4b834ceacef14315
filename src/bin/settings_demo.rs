use timebound::settings::*;

fn main() -> anyhow::Result<()> {
    // Load settings from the default location
    let project_settings = parse_settings(None)?;
    println!("Loaded settings: {:#?}", project_settings);

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // $ cargo run --bin settings_demo -- settings/release.toml
    if let Some(path) = std::env::args().nth(1) {
        let project_settings = parse_settings(Some(&path))?;
        println!("Loaded {}: store backend {:?}", path, project_settings.store.backend);
    }

    Ok(())
}
