fn main() -> Result<(), Box<dyn std::error::Error>> {
    tutorlens::cli::main()
}
