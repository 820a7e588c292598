//! Plotting of belief snapshots and diagnostic runs
//!
//! Renders to SVG through gnuplot. Consumers only ever see owned snapshots
//! and series, never the live filter.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Landmarks, LocalizationError, LocalizationResult, Pose2D, WorldBounds};
use crate::localization::{BeliefSnapshot, DivergenceSeries};

/// Color palette for consistent styling
pub mod colors {
    pub const LANDMARK: &str = "#000000";
    pub const PARTICLE: &str = "#FF0000";
    pub const AGENT: &str = "#0000FF";
    pub const ESTIMATED: &str = "#35C788";
    pub const HEADING: &str = "#FFA500";
}

/// Belief scatter: landmarks, particles, true agent and mean estimate
pub fn plot_belief(snapshot: &BeliefSnapshot, landmarks: &Landmarks, world: &WorldBounds) -> Figure {
    let px: Vec<f64> = snapshot.particles.iter().map(|p| p.pose.x).collect();
    let py: Vec<f64> = snapshot.particles.iter().map(|p| p.pose.y).collect();
    let mean = snapshot.mean_pose();

    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title(&format!("Monte Carlo Localization (tick {})", snapshot.tick), &[])
            .set_x_label("x", &[])
            .set_y_label("y", &[])
            .set_x_range(AutoOption::Fix(0.0), AutoOption::Fix(world.width))
            .set_y_range(AutoOption::Fix(0.0), AutoOption::Fix(world.height))
            .set_aspect_ratio(AutoOption::Fix(world.height / world.width))
            .points(&landmarks.x_coords(), &landmarks.y_coords(), &[
                Caption("Landmarks"),
                Color(colors::LANDMARK),
                PointSymbol('S'),
                PointSize(1.5),
            ])
            .points(&px, &py, &[
                Caption("Particles"),
                Color(colors::PARTICLE),
                PointSymbol('O'),
                PointSize(0.5),
            ])
            .points(&[snapshot.agent.x], &[snapshot.agent.y], &[
                Caption("Agent"),
                Color(colors::AGENT),
                PointSymbol('O'),
                PointSize(2.0),
            ])
            .points(&[mean.x], &[mean.y], &[
                Caption("Mean estimate"),
                Color(colors::ESTIMATED),
                PointSymbol('x'),
                PointSize(2.0),
            ]);
        let (hx, hy) = heading_segment(&snapshot.agent, world.width.min(world.height) * 0.05);
        axes.lines(&hx, &hy, &[Color(colors::HEADING), LineWidth(2.0)]);
    }
    fg
}

/// Per-axis divergence against tick index
pub fn plot_divergence(series: &DivergenceSeries) -> Figure {
    let t = series.ticks();
    let mut fg = Figure::new();
    fg.axes2d()
        .set_title("Mean pose divergence", &[])
        .set_x_label("tick", &[])
        .set_y_label("absolute error", &[])
        .lines(&t, &series.dx(), &[Caption("|dx|"), Color("red")])
        .lines(&t, &series.dy(), &[Caption("|dy|"), Color("blue")])
        .lines(&t, &series.dheading(), &[Caption("|dheading| [rad]"), Color("green")]);
    fg
}

/// Save a figure as SVG
pub fn save_svg(fg: &mut Figure, path: &str) -> LocalizationResult<()> {
    fg.save_to_svg(path, 800, 600)
        .map_err(|e| LocalizationError::Visualization(e.to_string()))
}

fn heading_segment(pose: &Pose2D, len: f64) -> ([f64; 2], [f64; 2]) {
    (
        [pose.x, pose.x + len * pose.heading().cos()],
        [pose.y, pose.y + len * pose.heading().sin()],
    )
}
