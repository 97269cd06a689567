use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "agentflow")]
#[command(about = "Generador de reportes de análisis empresarial (CrewAI)")]
pub struct CliArgs {
    #[arg(long, help = "TOML config file (default: config/agentflow.toml)")]
    pub config: Option<String>,

    #[arg(long, help = "Analysis request file (TOML)")]
    pub request: Option<String>,

    #[arg(long, help = "Built-in template: retail, tech or finance")]
    pub template: Option<String>,

    #[arg(long, help = "Report language: es or en")]
    pub language: Option<String>,

    #[arg(long, help = "Force simulation even when a backend is configured")]
    pub simulate: bool,

    #[arg(long, help = "Show the cost estimate and exit without running")]
    pub dry_run: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["agentflow"]);
        assert!(args.config.is_none());
        assert!(args.request.is_none());
        assert!(!args.simulate);
        assert!(!args.dry_run);
        assert!(!args.verbose);
    }

    #[test]
    fn test_template_run() {
        let args = CliArgs::parse_from([
            "agentflow",
            "--template",
            "retail",
            "--language",
            "en",
            "--simulate",
            "--monitor",
        ]);
        assert_eq!(args.template.as_deref(), Some("retail"));
        assert_eq!(args.language.as_deref(), Some("en"));
        assert!(args.simulate);
        assert!(args.monitor);
    }
}
