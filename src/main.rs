fn main() {
    if let Err(err) = sales_ledger::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
