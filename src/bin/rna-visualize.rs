use std::process::ExitCode;

use rna_etl::console::{pause, report_error};
use rna_etl::viz::{self, ChartOutcome, VizReport};
use rna_etl::Settings;

fn main() -> ExitCode {
    env_logger::init();

    let dir = match std::env::current_dir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERREUR : dossier courant illisible : {e}");
            return ExitCode::FAILURE;
        }
    };
    let settings = match Settings::load(&dir) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    println!("Création des visualisations...");

    let code = match viz::run(&dir, &settings) {
        Ok(report) => {
            print_report(&report);
            if report
                .charts
                .iter()
                .any(|c| matches!(c.outcome, ChartOutcome::Failed(_)))
            {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    };

    pause(&settings.console);
    code
}

fn print_report(r: &VizReport) {
    println!("Données chargées : {} associations", r.rows);

    let total = r.charts.len();
    for (i, chart) in r.charts.iter().enumerate() {
        let label = match chart.name {
            "evolution" => "Graphique : évolution des créations",
            "locations" => "Graphique : top rues",
            _ => "Infographie statistiques",
        };
        println!("\n[{}/{total}] {label}...", i + 1);
        match &chart.outcome {
            ChartOutcome::Written(p) => println!("  OK {}", p.display()),
            ChartOutcome::Skipped(why) => println!("  ignoré : {why}"),
            ChartOutcome::Failed(why) => println!("  ÉCHEC : {why}"),
        }
    }

    let written: Vec<_> = r.written().collect();
    if !written.is_empty() {
        println!("\nVISUALISATIONS CRÉÉES !");
        println!("\nFichiers générés :");
        for p in written {
            println!("  • {}", p.display());
        }
    }
}
