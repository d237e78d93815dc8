//! WebAssembly bindings for the fluid backdrop.
//!
//! Thin wrappers around [`Simulation`] for browser hosts: the page feeds
//! pointer events and per-frame dt, then blits the RGBA frame into its
//! canvas.

use wasm_bindgen::prelude::*;

use crate::compute::SoftwareBackend;
use crate::input::Touch;
use crate::runtime::Simulation;
use crate::schema::SimulationConfig;

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for the fluid backdrop simulation.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a simulation from JSON configuration and a viewport size in
    /// device pixels. Fires the opening splat burst.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, width: u32, height: u32) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;

        let sim = Simulation::new(config, &SoftwareBackend, (width, height))
            .map_err(|e| JsValue::from_str(&format!("Initialization failed: {e}")))?;

        Ok(WasmSimulation { sim })
    }

    /// Advance one frame. `dt` is seconds since the previous frame; the
    /// simulation clamps it internally.
    #[wasm_bindgen]
    pub fn advance(&mut self, dt: f32) {
        self.sim.advance(dt);
    }

    /// Notify the simulation of a viewport resize; fields reallocate on
    /// the next `advance`.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) {
        self.sim.set_viewport(width, height);
    }

    /// Mouse movement in device pixels.
    #[wasm_bindgen(js_name = mouseMove)]
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.sim.mouse_move(x, y);
    }

    /// Touch starts: an array of `{id, x, y}` objects.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, touches: JsValue) -> Result<(), JsValue> {
        let touches: Vec<Touch> = serde_wasm_bindgen::from_value(touches)
            .map_err(|e| JsValue::from_str(&format!("Invalid touches: {e}")))?;
        self.sim.touch_start(&touches);
        Ok(())
    }

    /// Touch moves: an array of `{id, x, y}` objects.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, touches: JsValue) -> Result<(), JsValue> {
        let touches: Vec<Touch> = serde_wasm_bindgen::from_value(touches)
            .map_err(|e| JsValue::from_str(&format!("Invalid touches: {e}")))?;
        self.sim.touch_move(&touches);
        Ok(())
    }

    /// Touch ends: an array of contact identifiers.
    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, ids: Vec<f64>) {
        let ids: Vec<i64> = ids.into_iter().map(|id| id as i64).collect();
        self.sim.touch_end(&ids);
    }

    /// The composited RGBA frame, rows top-down, sized `frameWidth` x
    /// `frameHeight`.
    #[wasm_bindgen]
    pub fn frame(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.sim.frame())
    }

    #[wasm_bindgen(js_name = frameWidth)]
    pub fn frame_width(&self) -> usize {
        self.sim.frame_size().0
    }

    #[wasm_bindgen(js_name = frameHeight)]
    pub fn frame_height(&self) -> usize {
        self.sim.frame_size().1
    }

    /// Field statistics as a JSON object.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sim.stats())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}
