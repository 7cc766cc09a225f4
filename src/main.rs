use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use dependency_loader::config::{LoaderConfig, DATA_DIR_NAME, DEFAULT_USER_AGENT};
use dependency_loader::extension::SearchPath;
use dependency_loader::loader::{DependencyLoader, LoadedArtifacts};
use dependency_loader::maven::{ChecksumPolicy, LocalRepository, MavenResolver};
use dependency_loader::scanner::{scan, JarArchives};

#[derive(Parser)]
#[command(version, about = "Resolves the Maven dependencies declared by plugins and prints the resulting search path")]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct Options {
    /// directory containing the plugin archives
    #[arg(long, env = "DEPENDENCY_LOADER_PLUGINS_DIR", default_value = "plugins", global = true)]
    plugins_dir: PathBuf,

    /// data directory, the artifact cache lives in its `.m2` subdirectory [default: <plugins-dir>/DependencyLoader]
    #[arg(long, env = "DEPENDENCY_LOADER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ChecksumPolicy::VerifyIfPresent, global = true)]
    checksum_policy: ChecksumPolicy,

    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    /// write the search path to this file, one entry per line, instead of printing it
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// load the dependencies declared by all plugin archives (default)
    Scan,
    /// load artifacts given as <groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>
    Load {
        #[arg(required = true)]
        coordinates: Vec<String>,

        /// additional repository as <id>:<url>
        #[arg(long = "repository")]
        repositories: Vec<String>,
    },
}

impl Options {
    fn to_config(&self) -> LoaderConfig {
        let mut config = LoaderConfig::for_plugins_dir(&self.plugins_dir);
        config.data_dir = self.data_dir.clone()
            .unwrap_or_else(|| self.plugins_dir.join(DATA_DIR_NAME));
        config.checksum_policy = self.checksum_policy;
        config.user_agent = self.user_agent.clone();
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.options.to_config();
    info!("using local repository {}", config.local_repository_root().display());

    let resolver = MavenResolver::new(
        LocalRepository::new(config.local_repository_root()),
        config.checksum_policy,
        config.user_agent.clone(),
    );
    let search_path = SearchPath::new();
    let mut loader = DependencyLoader::new(resolver, &search_path, LoadedArtifacts::new());

    let code = match cli.command.unwrap_or(Command::Scan) {
        Command::Scan => {
            let report = scan(&JarArchives, &config.plugins_dir, &mut loader).await?;
            info!(
                "scanned {} plugin archives, loaded {} artifacts, {} failed",
                report.archives.len(),
                loader.registry().len(),
                report.failed_artifacts(),
            );
            ExitCode::SUCCESS
        }
        Command::Load { coordinates, repositories } => {
            for repository in &repositories {
                let Some((id, url)) = repository.split_once(':') else {
                    anyhow::bail!("invalid repository {:?}, expected <id>:<url>", repository);
                };
                loader.add_repository(id, url);
            }

            let mut failures = 0;
            for c in &coordinates {
                if loader.load_coordinates(c).await.is_err() {
                    failures += 1;
                }
            }
            if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
    };

    for (artifact_ref, path) in loader.registry().iter() {
        debug!("{} -> {}", artifact_ref, path.display());
    }
    write_search_path(&search_path, cli.options.output.as_ref())?;
    Ok(code)
}

fn write_search_path(search_path: &SearchPath, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let mut content = String::new();
            for entry in search_path.entries() {
                content.push_str(&entry.to_string_lossy());
                content.push('\n');
            }
            std::fs::write(path, content)?;
            info!("wrote search path to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", search_path.to_path_string().to_string_lossy())?;
        }
    }
    Ok(())
}
