use dymo_label::{Config, CupsSpooler, Spooler};
//
// cargo run --example read_status
//

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let spooler = CupsSpooler::from_config(&config);

    match spooler.status() {
        Ok(Some(status)) => match serde_json::to_string_pretty(&status) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Error {:?}", err),
        },
        Ok(None) => println!("Printer {} not found", spooler.printer_name()),
        Err(err) => println!("Error {}", err),
    }
}
