//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use rvx_ops::OperationResult;
use rvx_types::{ColorChoice, PatchMetadata, RunReport, SigningOutcome};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Loaded(count) => {
                println!("Loaded {count} patches.");
                Ok(())
            }
            OperationResult::PackageList(packages) => self.render_package_list(packages),
            OperationResult::PatchList(patches) => self.render_patch_list(patches),
            OperationResult::ResourcePatching(needed) => {
                if *needed {
                    println!("Resource patching required.");
                } else {
                    println!("No resource patching required.");
                }
                Ok(())
            }
            OperationResult::RunReport(report) => self.render_run_report(report),
            OperationResult::Success(message) => {
                println!("{message}");
                Ok(())
            }
        }
    }

    fn render_package_list(&self, packages: &[String]) -> io::Result<()> {
        if packages.is_empty() {
            println!("No packages targeted by the loaded patches.");
            return Ok(());
        }
        for package in packages {
            println!("{}", self.style_bold(package));
        }
        Ok(())
    }

    fn render_patch_list(&self, patches: &[PatchMetadata]) -> io::Result<()> {
        if patches.is_empty() {
            println!("No compatible patches.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Patch").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Default").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);

        for patch in patches {
            let default_cell = if patch.include {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no")
            };
            table.add_row(vec![
                Cell::new(&patch.name),
                Cell::new(if patch.version.is_empty() { "-" } else { patch.version.as_str() }),
                default_cell,
                Cell::new(if patch.description.is_empty() {
                    "-"
                } else {
                    patch.description.as_str()
                }),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn render_run_report(&self, report: &RunReport) -> io::Result<()> {
        let status = if report.is_clean() {
            "[OK]"
        } else if report.finished() {
            "[WARN]"
        } else {
            "[ERROR]"
        };
        println!(
            "{status} {}",
            self.style_bold(report.package_name.as_deref().unwrap_or("patch run"))
        );
        println!();

        if !report.applied.is_empty() {
            println!("Applied:");
            for patch in &report.applied {
                println!("  + {patch}");
            }
        }

        if !report.failed.is_empty() {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Failed patch").add_attribute(Attribute::Bold),
                Cell::new("Reason").add_attribute(Attribute::Bold),
            ]);
            for failure in &report.failed {
                table.add_row(vec![
                    Cell::new(&failure.patch).fg(Color::Red),
                    Cell::new(&failure.reason),
                ]);
            }
            println!("{table}");
        }

        match &report.signing {
            SigningOutcome::Signed { output } => println!("Signed: {}", output.display()),
            SigningOutcome::Failed { message } => println!("Signing failed: {message}"),
            SigningOutcome::NotAttempted => {}
        }

        if let Some(abort) = &report.aborted {
            println!("Aborted during {}: {}", abort.stage, abort.diagnostic);
        } else if let Some(artifact) = report.artifact() {
            println!("Output: {}", artifact.display());
        }

        Ok(())
    }

    fn style_bold(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
