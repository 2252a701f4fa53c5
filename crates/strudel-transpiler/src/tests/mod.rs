//! Behavioural tests for strudel-transpiler.
