use dymo_label::{Alignment, Config, LabelSize, Renderer, SAMPLE_TEXT};
use std::env;
//
// cargo run --example preview "Hello" 11354 center
//
// Writes label-<size>.png in the current directory.
//

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let text = args.get(1).map(String::as_str).unwrap_or(SAMPLE_TEXT);
    let size = match args.get(2).map(|code| LabelSize::from_code(code)) {
        Some(Ok(size)) => size,
        Some(Err(err)) => {
            eprintln!("{}", err);
            let codes: Vec<&str> = LabelSize::all().iter().map(|s| s.code()).collect();
            eprintln!("Available sizes: {}", codes.join(", "));
            return;
        }
        None => LabelSize::default(),
    };
    let align = match args.get(3).map(|a| a.parse::<Alignment>()) {
        Some(Ok(align)) => align,
        Some(Err(err)) => {
            eprintln!("{}", err);
            return;
        }
        None => Alignment::Center,
    };

    let config = Config::from_env();
    let renderer = Renderer::from_config(&config);
    if renderer.uses_builtin_font() {
        println!("font {} not found, using built-in font", config.get_font_path().display());
    }

    let image = renderer.render_size(text, size, dymo_label::DEFAULT_FONT_SIZE, align);
    let file = format!("label-{}.png", size);
    match image.save(&file) {
        Ok(()) => println!("{} ({}x{}) written to {}", size.name(), image.width(), image.height(), file),
        Err(err) => eprintln!("could not write {}: {}", file, err),
    }
}
