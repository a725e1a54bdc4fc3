//! Séquences ANSI pour les couleurs du panneau de prévisualisation

/// Réinitialise couleur et style
pub const RESET: &str = "\x1b[0m";

/// Couleur de premier plan 24 bits à partir de `"R,G,B"`
///
/// Retourne une chaîne vide si la couleur est mal formée : le texte
/// s'affiche alors sans couleur.
pub fn true_fg(rgb: &str, bold: bool) -> String {
    let parts: Vec<u8> = rgb
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();

    match parts.as_slice() {
        [r, g, b] if rgb.split(',').count() == 3 => {
            let weight = if bold { "1;" } else { "" };
            format!("\x1b[{weight}38;2;{r};{g};{b}m")
        }
        _ => {
            tracing::warn!(color = rgb, "Ignoring malformed RGB color");
            String::new()
        }
    }
}
