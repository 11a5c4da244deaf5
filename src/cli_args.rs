use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(author, about, version)]
pub struct CliArgs {
    /// Path to the configuration file. Defaults are used if omitted.
    #[clap(long, env = "CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Port to listen on. Overrides the configuration file.
    #[clap(long, env = "PORT")]
    pub port: Option<u16>,

    /// MongoDB connection string. Overrides the configured storage.
    #[clap(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// The one origin allowed to call the API cross-origin.
    #[clap(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,
}
