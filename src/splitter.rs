//! Troceado de texto en chunks solapados.
//!
//! Ventana deslizante sobre caracteres: cada chunk abarca como mucho
//! `chunk_size` caracteres y el corte prefiere, por este orden, un límite de
//! párrafo, un final de frase y, si no hay ninguno, el límite duro de
//! caracteres. El siguiente chunk arranca exactamente `chunk_overlap`
//! caracteres antes del corte anterior, de modo que cada par de chunks
//! consecutivos comparte exactamente `chunk_overlap` caracteres.
//!
//! Se trabaja sobre índices de `char`, nunca sobre bytes, para no partir
//! secuencias UTF-8 por la mitad.

/// Divide `text` en chunks de hasta `chunk_size` caracteres con un solape de
/// `chunk_overlap` caracteres entre chunks consecutivos.
///
/// Un texto vacío o sólo de espacios en blanco no produce ningún chunk.
/// Precondición (validada en `AppConfig`): `chunk_overlap < chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    debug_assert!(chunk_overlap < chunk_size);

    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let hard_end = (start + chunk_size).min(len);
        let end = if hard_end == len {
            len
        } else {
            // El corte no puede retroceder hasta la ventana de solape, o el
            // siguiente chunk no avanzaría.
            pick_cut(&chars, start + chunk_overlap + 1, hard_end)
        };

        chunks.push(chars[start..end].iter().collect());
        if end == len {
            break;
        }
        start = end - chunk_overlap;
    }
    chunks
}

/// Busca hacia atrás desde `hard_end` el mejor punto de corte dentro de
/// `(min_end, hard_end]`: primero tras una línea en blanco (párrafo), luego
/// tras un final de frase, y si no hay ninguno devuelve `hard_end`.
fn pick_cut(chars: &[char], min_end: usize, hard_end: usize) -> usize {
    let mut e = hard_end;
    while e > min_end {
        if chars[e - 1] == '\n' && chars[e - 2] == '\n' {
            return e;
        }
        e -= 1;
    }

    let mut e = hard_end;
    while e > min_end {
        if matches!(chars[e - 1], '.' | '!' | '?') && chars[e].is_whitespace() {
            return e;
        }
        e -= 1;
    }

    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solape(a: &str, b: &str, n: usize) -> bool {
        let cola: String = a.chars().rev().take(n).collect::<Vec<_>>().into_iter().rev().collect();
        let cabeza: String = b.chars().take(n).collect();
        cola == cabeza
    }

    #[test]
    fn texto_vacio_no_produce_chunks() {
        assert!(split_text("", 1000, 200).is_empty());
        assert!(split_text("   \n\n  ", 1000, 200).is_empty());
    }

    #[test]
    fn texto_corto_produce_un_solo_chunk() {
        let chunks = split_text("RAG combina recuperación y generación.", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "RAG combina recuperación y generación.");
    }

    #[test]
    fn solape_exacto_entre_chunks_consecutivos() {
        // Sin límites de párrafo ni frase: corte duro por caracteres.
        let text = "abcdefghij".repeat(250); // 2500 caracteres
        let chunks = split_text(&text, 1000, 200);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 900);
        for par in chunks.windows(2) {
            assert!(solape(&par[0], &par[1], 200));
        }
    }

    #[test]
    fn prefiere_cortar_en_limite_de_parrafo() {
        let para1 = "a".repeat(600);
        let para2 = "b".repeat(600);
        let text = format!("{para1}\n\n{para2}");

        let chunks = split_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].ends_with("\n\n"));
        assert_eq!(chunks[0].chars().count(), 602);
        // El solape se mantiene exacto aunque el corte sea blando.
        assert!(solape(&chunks[0], &chunks[1], 200));
    }

    #[test]
    fn prefiere_cortar_en_final_de_frase() {
        let frase1 = format!("{}. ", "a".repeat(598));
        let resto = "b".repeat(900);
        let text = format!("{frase1}{resto}");

        let chunks = split_text(&text, 1000, 200);
        assert!(chunks[0].ends_with('.'), "chunk: ...{:?}", &chunks[0][chunks[0].len() - 5..]);
        assert!(solape(&chunks[0], &chunks[1], 200));
    }

    #[test]
    fn no_parte_caracteres_multibyte() {
        let text = "ñ".repeat(1500);
        let chunks = split_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 700);
        assert!(solape(&chunks[0], &chunks[1], 200));
    }
}
