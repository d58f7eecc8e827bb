use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;

use scene_controls::{
    bind, BindingSpec, BindingTable, ConfigStore, ControlEvent, MemorySurface, Outcome,
    SceneConfig, Transform,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.config {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene config {path}"))?;
            SceneConfig::from_xml(&xml)
                .with_context(|| format!("failed to parse scene config {path}"))?
        }
        None => SceneConfig::default(),
    };

    let table = BindingTable::standard();
    let surface = MemorySurface::for_table(&table);
    let binder = bind(table, ConfigStore::from_config(config), surface)
        .context("failed to bind scene controls")?;
    println!("Bound {} control(s)", binder.bindings().count());

    for (control, raw) in &options.assignments {
        let spec = binder
            .binding(control)
            .ok_or_else(|| anyhow!("unknown control `{control}`"))?;
        let event = control_event(spec, raw)?;
        match binder.fire(control, &event)? {
            Outcome::Applied => println!("applied {control} = {raw}"),
            Outcome::Rejected(reason) => println!("ignored {control} = {raw} ({reason})"),
        }
        if let Some(readout) = &spec.readout {
            if let Some(text) = binder.surface().readout(readout) {
                println!("  {readout}: {text}");
            }
        }
    }

    let snapshot = binder.store().snapshot();
    if options.json {
        println!("{}", snapshot.to_json()?);
    } else {
        print_final_state(&snapshot);
    }
    Ok(())
}

/// Builds the event a control would report for `raw`. Checkboxes accept
/// `on`/`off` style values; `<id>!`/`<id>?` arrive here as `on`/`off`.
fn control_event(spec: &BindingSpec, raw: &str) -> Result<ControlEvent> {
    if spec.transform != Transform::Checked {
        return Ok(ControlEvent::value(raw));
    }
    let checked = match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "checked" => true,
        "off" | "false" | "0" | "unchecked" => false,
        other => {
            return Err(anyhow!(
                "checkbox `{}` expects on or off, found `{other}`",
                spec.control
            ))
        }
    };
    Ok(ControlEvent::checked(checked))
}

fn print_final_state(config: &SceneConfig) {
    println!("Final model states:");
    for (index, model) in config.models.iter().enumerate() {
        println!(
            " - item{} model={} shader={} scale={} pos={} autorotate={} axis={:?} rotate={:.2} shear={:.2} ka={:.2} kd={:.2} ks={:.2} shininess={:.2}",
            index + 1,
            model.model,
            model.shader,
            format_vec3(model.scale),
            format_vec3(model.pos),
            model.autorotate,
            model.rotate_axis,
            model.rotate_degree,
            model.shear_degree,
            model.ka,
            model.kd,
            model.ks,
            model.shininess
        );
    }
    println!("Final light states:");
    for (index, light) in config.lights.iter().enumerate() {
        println!(
            " - light{} pos={} color={}",
            index + 1,
            format_vec3(light.pos),
            format_vec3(light.color)
        );
    }
}

fn format_vec3(value: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", value.x, value.y, value.z)
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    config: Option<String>,
    json: bool,
    assignments: Vec<(String, String)>,
}

impl CliOptions {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config = None;
        let mut json = false;
        let mut assignments = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--config expects a path"))?;
                    config = Some(path);
                }
                "--json" => json = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --config <scene.xml> or --json"
                    ));
                }
                other if other.ends_with('!') || other.ends_with('?') => {
                    let (control, state) = other.split_at(other.len() - 1);
                    let value = if state == "!" { "on" } else { "off" };
                    assignments.push((control.to_string(), value.to_string()));
                }
                other => {
                    let (control, value) = other.split_once('=').ok_or_else(|| {
                        anyhow!("Usage: scene-controls [--config <scene.xml>] [--json] <control>=<value>|<checkbox>!|<checkbox>?...")
                    })?;
                    assignments.push((control.to_string(), value.to_string()));
                }
            }
        }
        Ok(Self {
            config,
            json,
            assignments,
        })
    }
}
