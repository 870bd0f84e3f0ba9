fn main() -> anyhow::Result<()> {
    plaza_client_lib::run()
}
