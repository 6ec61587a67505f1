use dymo_label::{Alignment, Config, LabelRequest, LabelService};
use std::env;
//
// cargo run --example print_label "Hello" 11354 2
// cargo run --example print_label --again <ID>
//
// Printer name, recency file and font are read from the environment or a .env file.
//

fn print_usage() {
    println!("Usage: cargo run --example print_label TEXT [SIZE] [COPIES]");
    println!("       cargo run --example print_label --again ID");
    println!("Environment:");
    println!("  LABEL_PRINTER      CUPS queue name (default: dymo)");
    println!("  LABEL_MEMORY_FILE  recently printed labels (default: saved_labels.json)");
    println!("  LABEL_FONT_PATH    TrueType font for the label text");
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let config = Config::from_env();
    let mut service = LabelService::from_config(&config);

    let request = if args[1] == "--again" {
        let id = match args.get(2) {
            Some(id) => id,
            None => {
                print_usage();
                return;
            }
        };
        match service.store().get(id) {
            Some(entry) => entry.to_request(),
            None => {
                eprintln!("Error: no saved label with id {}", id);
                return;
            }
        }
    } else {
        let mut request = LabelRequest::new(args[1].clone()).align(Alignment::Center);
        if let Some(size) = args.get(2) {
            request = request.label_size(size.clone());
        }
        if let Some(copies) = args.get(3) {
            match copies.parse::<u32>() {
                Ok(copies) => request = request.copies(copies),
                Err(_) => {
                    eprintln!("Error: copies must be a number, got '{}'", copies);
                    return;
                }
            }
        }
        request
    };

    match service.print(&request) {
        Ok(receipt) => println!("{}", receipt.message),
        Err(err) if err.is_client_error() => {
            eprintln!("Error: {}", err);
            print_usage();
        }
        Err(err) => eprintln!("Error: {}", err),
    }

    println!("Recently printed:");
    for entry in service.memory() {
        println!(
            "  {}  {:<20} {} {} {}pt x{}",
            entry.id, entry.text, entry.label_size, entry.align, entry.font_size, entry.copies
        );
    }
}
