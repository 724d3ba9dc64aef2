use serde::{Serialize, de::DeserializeOwned};

/// A remote method with typed parameters and result.
///
/// ```ignore
/// struct GetFolder;
///
/// impl Operation for GetFolder {
/// 	const METHOD: &'static str = "GetFolder";
/// 	type Params = GetFolderParams;
/// 	type Output = Folder;
/// }
/// ```
pub trait Operation {
	const METHOD: &'static str;

	/// Must serialize into a flat object of scalars.
	type Params: Serialize;

	type Output: DeserializeOwned;
}
