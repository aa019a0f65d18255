use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::borrow::Cow;
use anyhow::{Context, Result};
use crate::Error;
use crate::parsers::{ParseInstance, IntelFmt};
use crate::raw::mission::RawIntel;


pub trait IdxNameMap {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>>;

  fn name_to_index(&self, name: &str) -> Result<usize>;

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool { self.len() == 0 }

  fn check_idx(&self, idx: usize) -> Result<()> {
    if self.len() <= idx {
      Err(Error::IndexOutOfRange(idx).into())
    } else {
      Ok(())
    }
  }
}


impl<'a, D: IdxNameMap> IdxNameMap for &'a D {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    D::index_to_name(self, idx)
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    D::name_to_index(self, name)
  }

  fn len(&self) -> usize {
    D::len(self)
  }
}

pub trait Dataset: IdxNameMap {
  type Instance;
  fn load_instance(&self, idx: usize) -> Result<Self::Instance>;
}


impl<'a, D: Dataset> Dataset for &'a D {
  type Instance = D::Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    D::load_instance(self, idx)
  }
}


/// A directory of intelligence files.  Every `*.json` file is a scenario, named by its file stem
/// and indexed in file name order.
pub struct IntelDir {
  name_order: Vec<PathBuf>,
  name_to_idx_map: HashMap<String, usize>,
}

impl IntelDir {
  pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
      anyhow::bail!("not a scenario directory: {:?}", dir);
    }
    let mut p = glob::Pattern::escape(&dir.to_string_lossy());
    p.push('/');
    p.push_str("*.json");

    let names : std::result::Result<Vec<PathBuf>, _> = glob::glob(&p)?.collect();
    let mut name_order = names?;
    name_order.sort();
    let name_to_idx_map: Result<HashMap<_, _>> = name_order.iter()
      .enumerate()
      .map(|(k, p)| {
        let n = p.file_stem().ok_or_else(|| anyhow::anyhow!("missing file stem: {:?}", p))?;
        Ok((n.to_string_lossy().into_owned(), k))
      })
      .collect();
    let name_to_idx_map = name_to_idx_map?;
    Ok(IntelDir {
      name_order,
      name_to_idx_map
    })
  }

  pub fn path(&self, idx: usize) -> Result<&Path> {
    self.check_idx(idx)?;
    Ok(&self.name_order[idx])
  }
}

impl IdxNameMap for IntelDir {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    let name = self.path(idx)?.file_stem()
      .ok_or_else(|| anyhow::anyhow!("missing file stem for idx {}", idx))?;
    Ok(name.to_string_lossy())
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    let idx = *self.name_to_idx_map.get(name)
      .ok_or_else(|| Error::UnknownScenarioName(name.to_string()))?;
    Ok(idx)
  }

  fn len(&self) -> usize { self.name_order.len() }
}

impl Dataset for IntelDir {
  type Instance = RawIntel;

  fn load_instance(&self, idx: usize) -> Result<RawIntel> {
    let path = self.path(idx)?;
    RawIntel::parse(IntelFmt(path)).context(format!("failed to load scenario {}", idx))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  const EMPIRE_DIR: &str = "../../data/empire";

  #[test]
  fn scenario_order() -> Result<()> {
    let dset = IntelDir::new(EMPIRE_DIR)?;
    assert_eq!(dset.len(), 5);
    assert_eq!(dset.index_to_name(0)?, "empire041");
    assert_eq!(dset.index_to_name(4)?, "empire045");
    assert_eq!(dset.name_to_index("empire043")?, 2);
    Ok(())
  }

  #[test]
  fn load_one() -> Result<()> {
    let dset = IntelDir::new(EMPIRE_DIR)?;
    let intel = (&dset).load_instance(dset.name_to_index("empire044")?)?;
    assert_eq!(intel.countdown, 10);
    Ok(())
  }

  #[test]
  fn unknown_scenario() -> Result<()> {
    let dset = IntelDir::new(EMPIRE_DIR)?;
    let err = dset.name_to_index("empire999").unwrap_err();
    assert_eq!(err.downcast::<Error>()?, Error::UnknownScenarioName("empire999".to_string()));
    assert!(dset.load_instance(5).is_err());
    Ok(())
  }

  #[test]
  #[should_panic]
  fn not_a_directory() {
    IntelDir::new("../../data/millennium-falcon.json").unwrap();
  }
}
