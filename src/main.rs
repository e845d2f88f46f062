use fabpath::{init_logging, transform, OutputKind, Step, TransformOptions};
use tracing::info;

/// Two layers of a triangle: the first travelled, the second deposited.
fn demo_design() -> Vec<Step> {
    vec![
        Step::point(40.0, 40.0, 0.2),
        Step::xy(50.0, 50.0),
        Step::xy(60.0, 40.0),
        Step::deposition(false),
        Step::point(40.0, 40.0, 0.4),
        Step::deposition(true),
        Step::xy(50.0, 50.0),
        Step::xy(60.0, 40.0),
    ]
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("fabpath {}", fabpath::VERSION);

    let steps = demo_design();
    let options = TransformOptions::default();

    let gcode = transform(&steps, OutputKind::Gcode, &options)?;
    if let Some(program) = gcode.as_gcode() {
        print!("{}", program);
    }

    let plot = transform(&steps, OutputKind::Plot, &options)?;
    if let Some(plot) = plot.as_plot() {
        info!(
            "plot: {} segments, {:.3} mm deposited, {:.3} mm travelled",
            plot.len(),
            plot.deposition_length(),
            plot.travel_length()
        );
        println!("{}", plot.to_json()?);
    }

    Ok(())
}
