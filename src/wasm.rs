//! WASM bindings for symcircuit.
//!
//! This module provides JavaScript-friendly bindings for use in web browsers.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmExpr, nodal_solve } from 'symcircuit';
//!
//! await init();
//!
//! const h = new WasmExpr('1 / (s^2 + 3*s + 2)');
//! console.log(h.partfrac().to_latex());
//! console.log(h.inverse_laplace(true).evaluate_at(1.0));
//!
//! console.log(nodal_solve(`
//!   V1 1 0 dc 10
//!   R1 1 2 5
//!   R2 2 0 5
//! `));
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Circuit;
use crate::error::SymCircuitError;
use crate::expr::{expr, Expr};
use crate::nodal::NodalAnalysis;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: SymCircuitError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A domain-aware expression exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmExpr {
    inner: Expr,
}

impl From<Expr> for WasmExpr {
    fn from(inner: Expr) -> Self {
        WasmExpr { inner }
    }
}

#[wasm_bindgen]
impl WasmExpr {
    /// Parse an expression; its domain follows from the variable it uses.
    ///
    /// # Example
    /// ```javascript
    /// const x = new WasmExpr('exp(-t) * u(t)');
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(text: &str) -> Result<WasmExpr, JsValue> {
        expr(text).map(WasmExpr::from).map_err(to_js)
    }

    /// Domain name, such as "Laplace" or "Time".
    #[wasm_bindgen(getter)]
    pub fn domain(&self) -> String {
        format!("{:?}", self.inner.domain())
    }

    /// Kind name, such as "LaplaceDomainImpedance".
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.inner.kind().to_string()
    }

    pub fn laplace(&self) -> Result<WasmExpr, JsValue> {
        self.inner.laplace().map(WasmExpr::from).map_err(to_js)
    }

    /// Inverse Laplace transform. Pass `causal` to take the unilateral
    /// inverse.
    pub fn inverse_laplace(&self, causal: bool) -> Result<WasmExpr, JsValue> {
        let x = if causal {
            self.inner
                .with_assumptions_merged(&crate::expr::Assumptions::new().with_causal(true))
        } else {
            self.inner.clone()
        };
        x.inverse_laplace().map(WasmExpr::from).map_err(to_js)
    }

    pub fn fourier(&self) -> Result<WasmExpr, JsValue> {
        self.inner.fourier().map(WasmExpr::from).map_err(to_js)
    }

    pub fn inverse_fourier(&self) -> Result<WasmExpr, JsValue> {
        self.inner.inverse_fourier().map(WasmExpr::from).map_err(to_js)
    }

    pub fn ztransform(&self) -> Result<WasmExpr, JsValue> {
        self.inner.ztransform().map(WasmExpr::from).map_err(to_js)
    }

    pub fn inverse_ztransform(&self) -> Result<WasmExpr, JsValue> {
        self.inner.inverse_ztransform().map(WasmExpr::from).map_err(to_js)
    }

    pub fn canonical(&self) -> WasmExpr {
        self.inner.canonical().into()
    }

    pub fn general(&self) -> WasmExpr {
        self.inner.general().into()
    }

    pub fn partfrac(&self) -> WasmExpr {
        self.inner.partfrac().into()
    }

    pub fn standard(&self) -> WasmExpr {
        self.inner.standard().into()
    }

    pub fn timeconst(&self) -> WasmExpr {
        self.inner.timeconst().into()
    }

    pub fn zpk(&self) -> WasmExpr {
        self.inner.zpk().into()
    }

    pub fn numerator(&self) -> WasmExpr {
        self.inner.numerator().into()
    }

    pub fn denominator(&self) -> WasmExpr {
        self.inner.denominator().into()
    }

    pub fn simplify(&self) -> WasmExpr {
        self.inner.simplify().into()
    }

    /// Poles as strings, one entry per pole with repeats expanded.
    pub fn poles(&self) -> Vec<String> {
        self.inner.poles_list().iter().map(|p| p.to_string()).collect()
    }

    /// Zeros as strings, one entry per zero with repeats expanded.
    pub fn zeros(&self) -> Vec<String> {
        self.inner.zeros_list().iter().map(|z| z.to_string()).collect()
    }

    /// Real part of the value at `arg`.
    pub fn evaluate_at(&self, arg: f64) -> Result<f64, JsValue> {
        self.inner.evaluate_at(arg).map(|v| v.re()).map_err(to_js)
    }

    /// Sample the expression at many points. Complex results are reduced
    /// to their real parts.
    pub fn evaluate_many(&self, args: &[f64]) -> Result<Vec<f64>, JsValue> {
        let values = self.inner.evaluate_many(args).map_err(to_js)?;
        Ok((0..values.len())
            .filter_map(|i| values.get(i))
            .map(|v| v.re())
            .collect())
    }

    pub fn to_latex(&self) -> String {
        self.inner.latex()
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.inner.to_string()
    }
}

/// Solve a netlist for its Laplace-domain node voltages, one
/// `node = value` line each.
#[wasm_bindgen]
pub fn nodal_solve(netlist: &str) -> Result<String, JsValue> {
    let circuit = Circuit::from_netlist(netlist).map_err(to_js)?;
    let analysis = NodalAnalysis::new(&circuit, crate::expr::Domain::Laplace).map_err(to_js)?;
    let voltages = analysis.solve().map_err(to_js)?;
    Ok(voltages
        .iter()
        .map(|(node, value)| format!("{} = {}", node, value))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
