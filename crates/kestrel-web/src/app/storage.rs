use kestrel_core::theme::{
  ResolvedTheme,
  THEME_STORAGE_KEY,
  ThemeStore
};

pub const SYSTEM_DARK_QUERY: &str =
  "(prefers-color-scheme: dark)";

fn local_storage() -> Option<web_sys::Storage>
{
  web_sys::window().and_then(|window| {
    window.local_storage().ok().flatten()
  })
}

/// Theme persistence in `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalThemeStore;

impl ThemeStore for LocalThemeStore {
  fn load(&self) -> Option<String> {
    local_storage().and_then(|storage| {
      storage
        .get_item(THEME_STORAGE_KEY)
        .ok()
        .flatten()
    })
  }

  fn save(
    &self,
    value: &str
  ) -> anyhow::Result<()> {
    let storage = local_storage()
      .ok_or_else(|| {
        anyhow::anyhow!(
          "localStorage is unavailable"
        )
      })?;
    storage
      .set_item(THEME_STORAGE_KEY, value)
      .map_err(|err| {
        anyhow::anyhow!(
          "failed to store theme: {err:?}"
        )
      })
  }
}

pub fn system_prefers_dark() -> bool {
  web_sys::window()
    .and_then(|window| {
      window
        .match_media(SYSTEM_DARK_QUERY)
        .ok()
        .flatten()
    })
    .is_some_and(|query| query.matches())
}

/// Paints the theme on `<html data-theme>`.
pub fn apply_theme(theme: ResolvedTheme) {
  let root = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document.document_element()
    });
  if let Some(root) = root
    && let Err(err) = root.set_attribute(
      "data-theme",
      theme.class_name()
    )
  {
    tracing::warn!(error = ?err, "failed to apply theme");
  }
}
