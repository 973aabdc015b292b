//! Python bindings for rematch
//!
//! Exposes `compile`, `match` and `replace` with the host calling convention.
//! Positional arguments take `bytes` or `str`; option lists use `str` for
//! atoms and tuples for tagged entries:
//!
//! ```python
//! import rematch
//! ok, pat = rematch.compile(r"(?P<k>\w+)=(\w+)", ["caseless"])
//! rematch.match("a=b", pat, [("capture", ["k", 2], "index")])
//! # ('match', [(0, 1), (2, 1)])
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyList, PyString, PyTuple};
use rematch_lib::host;
use rematch_lib::{Fault, Pattern, Term};
use std::sync::Arc;

/// A compiled pattern handle
#[pyclass(name = "Pattern", frozen)]
pub struct PyPattern {
    inner: Arc<Pattern>,
}

#[pymethods]
impl PyPattern {
    /// The pattern source
    #[getter]
    fn pattern(&self) -> &str {
        self.inner.as_str()
    }

    /// Number of capturing groups
    #[getter]
    fn groups(&self) -> usize {
        self.inner.group_count()
    }

    /// Group names mapped to their ordinals
    #[getter]
    fn groupindex(&self) -> Vec<(String, usize)> {
        self.inner
            .groups()
            .named()
            .map(|(name, index)| (name.to_string(), index))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!("rematch.Pattern({:?})", self.inner.as_str())
    }
}

/// How `str` values are read
#[derive(Clone, Copy)]
enum Text {
    /// As UTF-8 bytes (subjects, patterns, templates)
    Binary,
    /// As atoms (option lists)
    Atom,
}

fn to_term(obj: &Bound<'_, PyAny>, text: Text) -> PyResult<Term> {
    if let Ok(pattern) = obj.downcast::<PyPattern>() {
        return Ok(Term::Pattern(Arc::clone(&pattern.get().inner)));
    }
    if let Ok(bytes) = obj.downcast::<PyBytes>() {
        return Ok(Term::Binary(bytes.as_bytes().to_vec()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        let s = s.to_str()?;
        return Ok(match text {
            Text::Binary => Term::binary(s),
            Text::Atom => Term::atom(s),
        });
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| to_term(&item, text))
            .collect::<PyResult<Vec<_>>>()
            .map(Term::List);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple
            .iter()
            .map(|item| to_term(&item, text))
            .collect::<PyResult<Vec<_>>>()
            .map(Term::Tuple);
    }
    if let Ok(n) = obj.extract::<i64>() {
        return Ok(Term::Int(n));
    }
    Err(PyValueError::new_err(format!(
        "unsupported argument type: {}",
        obj.get_type().name()?
    )))
}

fn to_py<'py>(py: Python<'py>, term: Term) -> PyResult<Bound<'py, PyAny>> {
    Ok(match term {
        Term::Atom(name) => PyString::new(py, &name).into_any(),
        Term::Int(n) => n.into_pyobject(py)?.into_any(),
        Term::Binary(bytes) => PyBytes::new(py, &bytes).into_any(),
        Term::List(items) => {
            let items = items
                .into_iter()
                .map(|item| to_py(py, item))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new(py, items)?.into_any()
        }
        Term::Tuple(items) => {
            let items = items
                .into_iter()
                .map(|item| to_py(py, item))
                .collect::<PyResult<Vec<_>>>()?;
            PyTuple::new(py, items)?.into_any()
        }
        Term::Pattern(inner) => Bound::new(py, PyPattern { inner })?.into_any(),
    })
}

fn args(
    positional: &[&Bound<'_, PyAny>],
    options: Option<&Bound<'_, PyAny>>,
) -> PyResult<Vec<Term>> {
    let mut terms = positional
        .iter()
        .map(|arg| to_term(arg, Text::Binary))
        .collect::<PyResult<Vec<_>>>()?;
    if let Some(options) = options {
        terms.push(to_term(options, Text::Atom)?);
    }
    Ok(terms)
}

fn call<'py>(
    py: Python<'py>,
    op: fn(&[Term]) -> Result<Term, Fault>,
    args: Vec<Term>,
) -> PyResult<Bound<'py, PyAny>> {
    let result = py
        .allow_threads(|| op(&args))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    to_py(py, result)
}

/// Compile a pattern: `("ok", Pattern)` or `("error", (code, message, fragment))`
#[pyfunction(signature = (pattern, options=None))]
fn compile<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    options: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    call(py, host::compile, args(&[pattern], options)?)
}

/// Match a subject: `"match"`, `("match", [values])`, `"nomatch"` or `("error", tag)`
#[pyfunction(name = "match", signature = (subject, pattern, options=None))]
fn match_<'py>(
    py: Python<'py>,
    subject: &Bound<'py, PyAny>,
    pattern: &Bound<'py, PyAny>,
    options: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    call(py, host::run_match, args(&[subject, pattern], options)?)
}

/// Replace matches: the result as `bytes`, or `"error"` if nothing was replaced
#[pyfunction(signature = (subject, pattern, template, options=None))]
fn replace<'py>(
    py: Python<'py>,
    subject: &Bound<'py, PyAny>,
    pattern: &Bound<'py, PyAny>,
    template: &Bound<'py, PyAny>,
    options: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    call(py, host::replace, args(&[subject, pattern, template], options)?)
}

/// Rematch Python module
#[pymodule(name = "rematch")]
fn rematch_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPattern>()?;
    m.add_function(wrap_pyfunction!(compile, m)?)?;
    m.add_function(wrap_pyfunction!(match_, m)?)?;
    m.add_function(wrap_pyfunction!(replace, m)?)?;
    Ok(())
}
