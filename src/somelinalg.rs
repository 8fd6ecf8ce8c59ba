//! some linear algebra functions used throughout the code
#![allow(non_snake_case)]
/// dense matrix helpers on top of nalgebra
pub mod dense_matrix;
/// Jacobi, Gauss-Seidel and SOR in matrix form x = T x + C
pub mod iterative_solvers_cpu;
/// LU decomposition with partial pivoting
pub mod LUsolver;
