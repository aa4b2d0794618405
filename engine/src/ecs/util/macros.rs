/// Invoke `$m` once per tuple length, from the full list down to a single type.
#[macro_export]
macro_rules! for_every_tuple {
    ($m:ident !! $head_ty:ident) => {
        $m!($head_ty);
    };
    ($m:ident !! $head_ty:ident, $($tail_ty:ident),*) => (
        $m!($head_ty, $( $tail_ty ),*);
        $crate::for_every_tuple!($m !! $( $tail_ty ),*);
    );
}

/// Apply a macro to all tuple combinations from A to Z.
#[macro_export]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::for_every_tuple!($m !! A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z);
    };
}
