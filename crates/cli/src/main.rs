use anyhow::Result;

fn main() -> Result<()> {
    pervasive_cli::main_entry()
}
