//! inkflow CLI - Run the fluid backdrop headless from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use inkflow::{
    compute::{FrameStats, SoftwareBackend},
    runtime::Simulation,
    schema::SimulationConfig,
};

/// Headless viewport the simulation is sized for.
const VIEWPORT: (u32, u32) = (1280, 720);

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [frames]", args[0]);
        eprintln!();
        eprintln!("Run the fluid backdrop headless and report field statistics.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  frames       Number of frames to simulate (default: 300)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(300);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let mut sim = Simulation::new(config, &SoftwareBackend, VIEWPORT).unwrap_or_else(|e| {
        eprintln!("Error initializing simulation: {}", e);
        std::process::exit(1);
    });

    let (frame_w, frame_h) = sim.frame_size();

    println!("inkflow");
    println!("=======");
    println!("Viewport: {}x{}", VIEWPORT.0, VIEWPORT.1);
    println!("Frame: {}x{}", frame_w, frame_h);
    println!(
        "Pressure iterations: {}",
        sim.config().pressure_iterations
    );
    println!("Frames: {}", frames);
    println!();

    let initial_stats = sim.stats();
    println!("After opening burst:");
    print_stats(&initial_stats);
    println!();

    // Run the loop with a scripted pointer sweep so the input path is
    // exercised the way an idle visitor's cursor would.
    println!("Running...");
    let start = Instant::now();

    for i in 0..frames {
        let t = i as f32 * 0.05;
        let x = VIEWPORT.0 as f32 * (0.5 + 0.35 * t.cos());
        let y = VIEWPORT.1 as f32 * (0.5 + 0.35 * t.sin());
        sim.mouse_move(x, y);
        sim.advance(1.0 / 60.0);

        // Print progress every 10%
        if (i + 1) % (frames / 10).max(1) == 0 {
            let stats = sim.stats();
            let elapsed = start.elapsed().as_secs_f32();
            let fps = (i + 1) as f32 / elapsed;
            println!(
                "  Frame {}/{}: dye={:.3}, peak speed={:.1}, {:.1} fps",
                i + 1,
                frames,
                stats.dye_total,
                stats.max_speed,
                fps
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = sim.stats();

    println!();
    println!("Final state:");
    print_stats(&final_stats);
    println!();
    println!(
        "Time: {:.2}s ({:.1} fps)",
        elapsed.as_secs_f32(),
        frames as f32 / elapsed.as_secs_f32()
    );
}

fn print_stats(stats: &FrameStats) {
    println!("  Total dye: {:.6}", stats.dye_total);
    println!("  Peak dye: {:.6}", stats.dye_max);
    println!("  Peak speed: {:.6}", stats.max_speed);
    println!("  Peak divergence: {:.6}", stats.max_divergence);
}

fn print_example_config() {
    let config = SimulationConfig::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
