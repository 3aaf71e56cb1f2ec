pub mod arithmetic;
pub mod builtin_functions;
pub mod cmath;
pub mod evaluator;
pub mod math;
pub mod statistical;

// Re-export the main public functions
pub use evaluator::evaluate_rpn;
