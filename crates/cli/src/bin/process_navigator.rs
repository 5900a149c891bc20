use anyhow::Result;

fn main() -> Result<()> {
    arbitrem_cli::main_entry()
}
