fn main() -> anyhow::Result<()> {
    convert_vcf::cli::run()
}
