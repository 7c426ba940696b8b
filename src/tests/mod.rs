mod test_volume;
