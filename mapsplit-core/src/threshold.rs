/// Whether a compressed artifact of `artifact_size` bytes must be split.
/// An artifact exactly at the threshold stays whole.
pub fn needs_split(artifact_size: u64, threshold: u64) -> bool {
    artifact_size > threshold
}
